use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TipCategory {
    Nutrition,
    Wellness,
    Preparation,
    Health,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTip {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub category: TipCategory,
    pub is_prime: bool,
}

pub const DAILY_TIPS: [DailyTip; 5] = [
    DailyTip {
        id: "1",
        title: "Stay Hydrated",
        content: "Drink at least 8-10 glasses of water daily. Proper hydration supports your baby's development and helps prevent common pregnancy discomforts like constipation and swelling.",
        category: TipCategory::Health,
        is_prime: false,
    },
    DailyTip {
        id: "2",
        title: "Prenatal Vitamins Matter",
        content: "Take your prenatal vitamins daily, especially folic acid. These supplements help prevent neural tube defects and support your baby's brain and spine development.",
        category: TipCategory::Nutrition,
        is_prime: false,
    },
    DailyTip {
        id: "3",
        title: "Gentle Exercise Benefits",
        content: "Light exercises like walking or prenatal yoga can improve your mood, reduce back pain, and prepare your body for labor. Always consult your healthcare provider first.",
        category: TipCategory::Wellness,
        is_prime: false,
    },
    DailyTip {
        id: "4",
        title: "Create Your Birth Plan",
        content: "Start thinking about your birth preferences. Consider pain management options, who you want present, and your postpartum care wishes. Discuss with your healthcare team.",
        category: TipCategory::Preparation,
        is_prime: true,
    },
    DailyTip {
        id: "5",
        title: "Baby's Sleep Patterns",
        content: "Your baby can hear your voice and heartbeat in the womb. Talk or sing to them - it helps with bonding and can be soothing after birth.",
        category: TipCategory::Wellness,
        is_prime: false,
    },
];

/// Tips visible to the user. Prime tips are hidden from free users.
pub fn tips_for(is_prime: bool) -> Vec<&'static DailyTip> {
    DAILY_TIPS
        .iter()
        .filter(|tip| is_prime || !tip.is_prime)
        .collect()
}

pub fn next_tip_index(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

pub fn previous_tip_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current % len + len - 1) % len
    }
}

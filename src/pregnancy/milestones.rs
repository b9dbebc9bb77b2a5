#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub baby_size: &'static str,
    pub milestone: &'static str,
}

pub const DEFAULT_MILESTONE: Milestone = Milestone {
    baby_size: "Grape",
    milestone: "Your pregnancy journey begins!",
};

const INDUCTION: &str = "Your doctor will likely discuss induction soon.";

// Index 0 is week 1.
const MILESTONES: [Milestone; 44] = [
    m("Poppy seed", "Your journey begins! The miracle of life starts here."),
    m("Sesame seed", "Baby is just a tiny cluster of cells, but growth is rapid!"),
    m("Sesame seed", "Neural tube is forming - this will become baby's brain and spine."),
    m("Sesame seed", "Baby's heart begins to beat!"),
    m("Apple seed", "Tiny limb buds are starting to appear."),
    m("Lentil", "Baby's heart is beating regularly now."),
    m("Blueberry", "Baby has doubled in size this week!"),
    m("Raspberry", "Tiny fingers and toes are forming."),
    m("Cherry", "Baby's tail disappears and muscles are developing."),
    m("Strawberry", "Baby's vital organs are functional!"),
    m("Lime", "Baby can hiccup, though you can't feel it yet."),
    m("Plum", "End of first trimester - major organs are developing."),
    m("Peach", "Second trimester begins - baby's fingerprints are forming!"),
    m("Lemon", "Baby can make facial expressions now."),
    m("Apple", "Baby is moving constantly, though you might not feel it yet."),
    m("Avocado", "You might feel baby's first movements!"),
    m("Pear", "Baby can hear sounds from outside the womb."),
    m("Sweet potato", "Baby is yawning and making facial expressions."),
    m("Mango", "Baby's senses are developing rapidly."),
    m("Banana", "Halfway there! Time for anatomy scan."),
    m("Carrot", "Baby can taste what you eat through amniotic fluid."),
    m("Spaghetti squash", "Baby's sense of touch is developing."),
    m("Grapefruit", "Baby can hear your heartbeat and voice clearly."),
    m("Corn cob", "Baby can hear your voice clearly now."),
    m("Rutabaga", "Baby may respond to familiar voices."),
    m("Red bell pepper", "Baby's eyes are beginning to open."),
    m("Cauliflower", "Baby can recognize your voice!"),
    m("Eggplant", "Third trimester begins - baby's eyes can open!"),
    m("Butternut squash", "Baby's bones are hardening."),
    m("Large cabbage", "Baby's lanugo (fine hair) starts to disappear."),
    m("Coconut", "Baby is gaining weight rapidly now."),
    m("Jicama", "Baby's bones are hardening, gaining weight rapidly."),
    m("Pineapple", "Baby's immune system is developing."),
    m("Cantaloupe", "Baby's lungs are maturing for breathing."),
    m("Honeydew melon", "Baby's kidneys are fully developed."),
    m("Papaya", "Baby is considered full-term in 1 more week!"),
    m("Winter melon", "Baby is now considered early term!"),
    m("Leek", "Baby is full-term and ready to be born!"),
    m("Small pumpkin", "Baby is gaining about an ounce per day."),
    m("Watermelon", "Your due date is here - ready to meet your little one!"),
    m("Watermelon", "Baby is ready when they are - some go past due date."),
    m("Watermelon", INDUCTION),
    m("Watermelon", INDUCTION),
    m("Watermelon", INDUCTION),
];

const fn m(baby_size: &'static str, milestone: &'static str) -> Milestone {
    Milestone {
        baby_size,
        milestone,
    }
}

/// Milestone for a gestational week. Week 0 has no entry; weeks past the
/// table plateau on its last row.
pub fn milestone_for(week: u32) -> Option<&'static Milestone> {
    if week == 0 {
        return None;
    }
    let idx = (week as usize - 1).min(MILESTONES.len() - 1);
    MILESTONES.get(idx)
}

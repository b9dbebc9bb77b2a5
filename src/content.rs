mod affirmations;
mod seed;
mod tips;

pub use affirmations::{Affirmation, AffirmationCategory, AffirmationRepository, MAX_TEXT_LEN};
pub use seed::SEED_AFFIRMATIONS;
pub use tips::{DAILY_TIPS, DailyTip, TipCategory, next_tip_index, previous_tip_index, tips_for};

pub mod affirmations;

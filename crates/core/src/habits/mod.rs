mod types;

pub use types::{HabitTemplate, ProfileUpdate, UserProfile, VacationPeriod};

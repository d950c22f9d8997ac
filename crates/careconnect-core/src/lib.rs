pub mod anonymize;
pub mod bundle;
pub mod clock;
pub mod feedback;
pub mod profile;
pub mod reference;
pub mod resolve;

pub use anonymize::anonymize;
pub use bundle::{Content, ContentBundle, Domain, Fields, LiveResponse, ShapeError, UnknownDomain};
pub use clock::{Clock, DayBoundary, FixedClock, SystemClock};
pub use feedback::{
    Category, CategoryTally, Engagement, FeedbackEntry, FeedbackKind, FeedbackLog,
    FeedbackSummary,
};
pub use profile::{AgeGroup, AnonymizedProfile, Profile};
pub use reference::reference_dataset;
pub use resolve::{Backfill, Resolution, is_present, resolve, resolve_bundle};

pub mod audit;
pub mod project;
pub mod track;
pub mod track_section;
pub mod workstation;

pub use audit::Audit;
pub use project::Project;
pub use track::Track;
pub use track_section::{TrackSection, MAX_STEP_COUNT};
pub use workstation::WorkstationState;

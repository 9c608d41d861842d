pub mod availability;
pub mod professional;

pub use availability::AvailabilityGrid;
pub use professional::ProfessionalService;

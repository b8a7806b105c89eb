//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FragmentRepository, FileSystem)
//! but are themselves concrete structs, not traits.

mod assembler;
mod context;
mod nondisclosure;

pub use assembler::{RawContract, SectionAssembler};
pub use context::{ContextService, DISCLOSING_PARTY, RECEIVING_PARTY};
pub use nondisclosure::NondisclosureService;

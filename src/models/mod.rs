//! Embedded numerical-model library.
//!
//! The generated plug-in source carries C++ renditions of these same
//! algorithms; keeping the reference implementations here, tested,
//! means the emitter's constants and formulas live in one place.
//!
//! - Nonlinear: Shockley diode (Newton-Raphson and LUT), Ebers-Moll
//!   BJT, quadratic FET, behavioral op-amp
//! - Linear: sample-rate-aware RC filters, capacitor/inductor blocks
//! - The immutable part database
//!
//! Solvers are best effort by contract: they clamp, cap iterations, and
//! fall back to the last iterate instead of returning errors.

pub mod bjt;
pub mod diode;
pub mod fet;
pub mod opamp;
pub mod partdb;
pub mod passive;

pub use bjt::{BjtCharacteristics, BjtModel, BjtOperatingPoint, TransistorClippingStage};
pub use diode::{
    ClipperTopology, DiodeCharacteristics, DiodeClippingStage, DiodeLut, DiodeNewtonRaphson,
    DiodeSolution, SolverConfig,
};
pub use fet::{FetCharacteristics, FetModel, FetOperatingPoint, FetRegion};
pub use opamp::{OpAmpCharacteristics, OpAmpModel};
pub use partdb::{database, PartDatabase, TriodeCharacteristics};
pub use passive::{CapacitorModel, InductorModel, RcHighPass, RcLowPass, ResistorModel};

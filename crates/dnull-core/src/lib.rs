// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Double-Null Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bottom-half to double-null conversion of edge-plasma solutions.
//!
//! Index layout and reflection primitives, the solver capability trait,
//! an in-memory solver, and the conversion driver.

pub mod convert;
pub mod layout;
pub mod memory;
pub mod reflect;
pub mod solver;

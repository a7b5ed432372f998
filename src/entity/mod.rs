//! Hand-maintained sea-orm entities mirroring the `migration` crate schema

pub mod prelude;

pub mod attendance_record;
pub mod employee;
pub mod entreprise;
pub mod payment;
pub mod sea_orm_active_enums;
pub mod user;

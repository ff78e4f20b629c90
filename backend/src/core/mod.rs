//! Core numeric helpers shared by every waterfall component

pub mod money;

pub use money::{
    allocate_pro_rata, apply_multiple, cents_to_dollars, checked_dollars_to_cents, checked_multiple,
    dollars_to_cents,
};

//! Integration test suite for the OakInk2 toolkit.
//!
//! Every test writes a small dataset tree into a temporary directory and
//! drives it through the public [`oakink2_toolkit::Dataset`] API.
//!
//! # Test Categories
//!
//! - `loading`: complex and primitive task assembly, side caches, batches
//! - `hydration`: tensor slicing, padding, masks, idempotence
//! - `affordance`: object/part resolution and the mesh cache
//! - `errors`: missing and malformed inputs


mod affordance;
mod hydration;
mod loading;

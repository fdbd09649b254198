// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text recognition endpoint
//!
//! Provides POST /readtext for recognizing text in an uploaded image.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{handle, readtext_handler};
pub use request::{parse_languages, ReadTextForm};
pub use response::ReadTextResponse;

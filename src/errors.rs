// ABOUTME: Error types re-exported from salon-core
// ABOUTME: AppError, ErrorCode and AppResult are shared by every server module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

pub use salon_core::errors::*;

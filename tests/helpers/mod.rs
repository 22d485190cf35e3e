// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the HTTP request harness and gateway resource builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
// Suites share these helpers; no single suite uses every one.
#![allow(dead_code)]

pub mod axum_test;
pub mod gateway;

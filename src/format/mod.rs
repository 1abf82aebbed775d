// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document format handling.
//!
//! Decks are persisted as structured snapshots; this module owns the HTML
//! surface used for import and export of renderable presentations.

pub mod html;

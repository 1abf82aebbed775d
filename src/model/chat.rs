// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat transcript entry, timestamped in epoch milliseconds.
///
/// Restore semantics compare these timestamps against a version's creation
/// time, so they are captured once at construction and never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
    created_at_ms: u64,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at_ms: now_ms(),
        }
    }

    pub fn with_timestamp(role: ChatRole, content: impl Into<String>, created_at_ms: u64) -> Self {
        Self {
            role,
            content: content.into(),
            created_at_ms,
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, ChatRole};

    #[test]
    fn with_timestamp_keeps_the_given_instant() {
        let message = ChatMessage::with_timestamp(ChatRole::User, "make it blue", 1234);
        assert_eq!(message.role(), ChatRole::User);
        assert_eq!(message.content(), "make it blue");
        assert_eq!(message.created_at_ms(), 1234);
    }
}

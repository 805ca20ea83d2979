// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Serialization shapes for the JSON columns of `audit_events`.

use serde::{Deserialize, Serialize};

/// Serialized actor information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    /// The actor identifier.
    pub id: String,
    /// The role the actor acted under.
    pub actor_type: String,
}

/// Serialized cause information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    /// The cause identifier.
    pub id: String,
    /// The cause description.
    pub description: String,
}

/// Serialized action information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    /// The action name.
    pub name: String,
    /// Optional action details.
    pub details: Option<String>,
}

/// Serialized state snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    /// The snapshot data string.
    pub data: String,
}

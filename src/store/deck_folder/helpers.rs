// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Deck folder persistence helpers:
/// wire DTO conversion, version file loading/GC, and safe filesystem writes.

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionMetaJson {
    session_id: String,
    #[serde(default)]
    selected_slides: Vec<usize>,
    #[serde(default)]
    next_version_number: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ChatRoleJson {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageJson {
    role: ChatRoleJson,
    content: String,
    created_at_ms: u64,
}

impl From<&ChatMessage> for ChatMessageJson {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: match message.role() {
                ChatRole::User => ChatRoleJson::User,
                ChatRole::Assistant => ChatRoleJson::Assistant,
            },
            content: message.content().to_owned(),
            created_at_ms: message.created_at_ms(),
        }
    }
}

impl From<ChatMessageJson> for ChatMessage {
    fn from(message: ChatMessageJson) -> Self {
        let role = match message.role {
            ChatRoleJson::User => ChatRole::User,
            ChatRoleJson::Assistant => ChatRole::Assistant,
        };
        ChatMessage::with_timestamp(role, message.content, message.created_at_ms)
    }
}

/// Verification records on disk: a plain hash-to-record object.
type VerificationJson = BTreeMap<String, VerificationRecord>;

fn verification_to_json(map: &VerificationMap) -> VerificationJson {
    map.records()
        .iter()
        .map(|(hash, record)| (hash.to_string(), record.clone()))
        .collect()
}

fn verification_from_json(records: VerificationJson) -> Result<VerificationMap, StoreError> {
    let mut map = VerificationMap::new();
    for (raw, record) in records {
        let hash = raw
            .parse::<ContentHash>()
            .map_err(|source| StoreError::InvalidHash {
                value: raw.clone(),
                source: Box::new(source),
            })?;
        map.record(hash, record);
    }
    Ok(map)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionJson {
    number: u64,
    description: String,
    created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    snapshot: DeckSnapshot,
    #[serde(default)]
    verification: VerificationJson,
    #[serde(default)]
    chat: Vec<ChatMessageJson>,
}

impl From<&Version> for VersionJson {
    fn from(version: &Version) -> Self {
        Self {
            number: version.number(),
            description: version.description().to_owned(),
            created_at_ms: version.created_at_ms(),
            created_by: version.created_by().map(str::to_owned),
            snapshot: version.snapshot().clone(),
            verification: verification_to_json(version.verification()),
            chat: version.chat().iter().map(ChatMessageJson::from).collect(),
        }
    }
}

fn version_from_json(version: VersionJson) -> Result<Version, StoreError> {
    let verification = verification_from_json(version.verification)?;
    Ok(Version::from_stored(
        version.number,
        version.description,
        version.snapshot,
        verification,
        version.chat.into_iter().map(ChatMessage::from).collect(),
        version.created_at_ms,
        version.created_by,
    ))
}

/// Loads every `v<n>.json` in the versions directory. Files that do not match
/// the version naming scheme are ignored; matching files must parse.
fn load_versions(versions_dir: &Path) -> Result<Vec<Version>, StoreError> {
    let entries = match fs::read_dir(versions_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: versions_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: versions_dir.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        if version_number_from_file_name(&file_name.to_string_lossy()).is_none() {
            continue;
        }

        let path = entry.path();
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let version_json = serde_json::from_str::<VersionJson>(&raw)
            .map_err(|source| StoreError::Json { path, source })?;
        versions.push(version_from_json(version_json)?);
    }

    versions.sort_by_key(Version::number);
    Ok(versions)
}

fn version_number_from_file_name(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix('v')?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Removes version files whose number is no longer stored (evicted or cut off
/// by a restore).
fn gc_version_files(folder: &DeckFolder, session: &DeckSession) -> Result<(), StoreError> {
    let versions_dir = folder.versions_dir();
    let entries = match fs::read_dir(&versions_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(StoreError::Io {
                path: versions_dir,
                source,
            })
        }
    };

    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: versions_dir.clone(),
            source,
        })?;
        let file_name = entry.file_name();
        let Some(number) = version_number_from_file_name(&file_name.to_string_lossy()) else {
            continue;
        };
        if session.versions().get(number).is_err() {
            let path = entry.path();
            fs::remove_file(&path).map_err(|source| StoreError::Io { path, source })?;
        }
    }

    Ok(())
}

fn read_json_opt<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(folder: &DeckFolder, path: &Path, value: &T) -> Result<(), StoreError> {
    let mut rendered =
        serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    rendered.push('\n');
    write_atomic_in_session(folder.root(), path, rendered.as_bytes(), folder.durability)
}

fn validate_relative_path(field: &'static str, path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Err(StoreError::InvalidRelativePath {
            field,
            value: path.to_path_buf(),
        });
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(StoreError::InvalidRelativePath {
                    field,
                    value: path.to_path_buf(),
                });
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

fn to_relative_path(
    session_dir: &Path,
    path: &Path,
    field: &'static str,
) -> Result<PathBuf, StoreError> {
    let relative = if path.is_absolute() {
        path.strip_prefix(session_dir)
            .map(PathBuf::from)
            .map_err(|_| StoreError::PathOutsideSession {
                session_dir: session_dir.to_path_buf(),
                path: path.to_path_buf(),
            })?
    } else {
        path.to_path_buf()
    };

    validate_relative_path(field, &relative)?;
    Ok(relative)
}

fn create_dir_all_safe(session_dir: &Path, relative: &Path) -> Result<(), StoreError> {
    if relative.as_os_str().is_empty() {
        return Ok(());
    }

    validate_relative_path("dir", relative)?;

    let mut current = session_dir.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };

        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) => {
                if md.file_type().is_symlink() {
                    return Err(StoreError::SymlinkRefused { path: current });
                }
                if !md.is_dir() {
                    return Err(StoreError::Io {
                        path: current,
                        source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                    });
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| StoreError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: current,
                    source,
                })
            }
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic_in_session(
    session_dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(session_dir).map_err(|source| StoreError::Io {
        path: session_dir.to_path_buf(),
        source,
    })?;

    let relative = to_relative_path(session_dir, path, "path")?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(session_dir, parent_rel)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".proteus.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

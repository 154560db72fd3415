//! Domain newtypes for stronger type safety
//!
//! This module provides newtypes for common domain concepts to avoid
//! primitive obsession and ensure validation at boundaries.

use nutype::nutype;
#[allow(unused_imports)] // These are used by nutype derive macros
use serde::{Deserialize, Serialize};

/// Short identifier for a structural section of a site
///
/// Section handles name the per-section content table, so they are restricted
/// to characters that are safe inside an unquoted SQL identifier.
#[nutype(
    validate(not_empty, len_char_max = 64, regex = r"^[a-z][a-z0-9_]*$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct SectionHandle(String);

/// Locale identifier for localized entry content (e.g. `en_us`)
#[nutype(
    validate(not_empty, len_char_max = 12, regex = r"^[a-z]{2}(_[a-z0-9]{2,8})?$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct LanguageCode(String);

/// Entry title
///
/// Limited to 255 characters to match the content table's column width.
#[nutype(
    validate(not_empty, len_char_max = 255),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct Title(String);

/// Handle identifying an installable feature plugin
#[nutype(
    validate(not_empty, len_char_max = 64, regex = r"^[a-z][a-z0-9-]*$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct PluginHandle(String);

/// Handle identifying a registered application component or module
#[nutype(
    validate(not_empty, len_char_max = 64, regex = r"^[a-zA-Z][a-zA-Z0-9_-]*$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct ComponentHandle(String);

/// Name identifying a registered schema migration
#[nutype(
    validate(not_empty, len_char_max = 128, regex = r"^[a-z0-9][a-z0-9_]*$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct MigrationName(String);

/// Identifier for the object an event fires on (a service or record type)
#[nutype(
    validate(not_empty, len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct EventSource(String);

/// Name of a triggered event
#[nutype(
    validate(not_empty, len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct EventName(String);

/// Error message payload for configuration errors
///
/// Limited to 5000 characters to capture detailed error information while
/// preventing excessive log/storage usage.
#[nutype(
    validate(not_empty, len_char_max = 5000),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct ErrorMessage(String);

/// Name of a resource that failed to resolve
#[nutype(
    validate(not_empty, len_char_max = 200),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct ResourceId(String);

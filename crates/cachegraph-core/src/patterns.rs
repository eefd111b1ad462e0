//! Name-pattern tables driving entity classification and mutation inference.
//!
//! Field patterns match case-insensitively as substrings of the field name.

/// Fields whose values change often.
pub const VOLATILE_FIELD_PATTERNS: &[&str] = &[
    "updatedAt",
    "modifiedAt",
    "lastModified",
    "lastUpdated",
    "lastSeen",
    "lastActive",
    "viewCount",
    "likeCount",
    "commentCount",
    "score",
    "rating",
    "status",
    "state",
];

/// Fields tying a record to a particular viewer or owner.
pub const USER_SPECIFIC_FIELD_PATTERNS: &[&str] = &[
    "userId",
    "ownerId",
    "authorId",
    "creatorId",
    "user",
    "owner",
    "author",
    "creator",
    "me",
    "currentUser",
    "viewer",
    "myProfile",
];

/// Fields carrying personal or secret data.
pub const SENSITIVE_FIELD_PATTERNS: &[&str] = &[
    "email",
    "password",
    "passwordHash",
    "token",
    "secret",
    "apiKey",
    "privateKey",
    "ssn",
    "creditCard",
    "phone",
    "address",
    "salary",
    "balance",
];

/// Type-name suffixes of pagination wrappers.
pub const COLLECTION_TYPE_SUFFIXES: &[&str] = &["Connection", "Edge", "List", "Page"];

pub const ROOT_TYPE_NAMES: &[&str] = &["Query", "Mutation", "Subscription"];

/// Verb prefixes whose remainder names the mutated type (`createPost` -> `Post`).
pub const MUTATION_VERB_PREFIXES: &[&str] = &[
    "create", "add", "insert", "update", "edit", "modify", "delete", "remove", "destroy",
];

/// True when the lowercased `name` contains any lowercased pattern.
pub fn matches_any(name: &str, patterns: &[&str]) -> bool {
    let name = name.to_lowercase();
    patterns
        .iter()
        .any(|pattern| name.contains(&pattern.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_match_is_case_insensitive() {
        assert!(matches_any("primaryEmailAddress", SENSITIVE_FIELD_PATTERNS));
        assert!(matches_any("UPDATEDAT", VOLATILE_FIELD_PATTERNS));
        assert!(matches_any("lastUpdatedAt", VOLATILE_FIELD_PATTERNS));
    }

    #[test]
    fn test_no_match() {
        assert!(!matches_any("title", SENSITIVE_FIELD_PATTERNS));
        assert!(!matches_any("id", USER_SPECIFIC_FIELD_PATTERNS));
    }

    #[test]
    fn test_short_patterns_match_inside_words() {
        // "me" is a plain substring pattern, so "name" counts as user-specific
        assert!(matches_any("name", USER_SPECIFIC_FIELD_PATTERNS));
    }
}

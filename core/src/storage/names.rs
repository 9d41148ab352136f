use super::{NOTE_EXTENSION, TEXT_EXTENSION};

/// Characters that are not allowed in file names on at least one supported platform.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const REPLACEMENT: char = '_';

/// Replaces every filesystem-illegal character with `_`, one for one.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { REPLACEMENT } else { c })
        .collect()
}

/// File name for a note: sanitized, known note suffix dropped, `extension` appended.
pub fn note_file_name(name: &str, extension: &str) -> String {
    let sanitized = sanitize_name(name);
    let stem = sanitized
        .strip_suffix(&format!(".{}", TEXT_EXTENSION))
        .unwrap_or(&sanitized);
    let stem = stem
        .strip_suffix(&format!(".{}", NOTE_EXTENSION))
        .unwrap_or(stem);
    format!("{}.{}", stem, extension)
}

/// Directory name for a folder. Names made only of dots would step outside the parent.
pub fn folder_dir_name(name: &str) -> String {
    let sanitized = sanitize_name(name);
    if !sanitized.is_empty() && sanitized.chars().all(|c| c == '.') {
        sanitized.replace('.', "_")
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_every_illegal_char() {
        let name = "a<b>c:d\"e/f\\g|h?i*j";
        let sanitized = sanitize_name(name);

        assert!(!sanitized.contains(ILLEGAL_CHARS));
        assert_eq!(sanitized, "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitized.chars().count(), name.chars().count());
    }

    #[test]
    fn test_sanitize_preserves_everything_else() {
        let name = "Grocery list — 2024 (v2) ünïcødé 🦀.txt";
        assert_eq!(sanitize_name(name), name);

        let mixed = "x/y?🦀";
        let substitutions = mixed.chars().filter(|c| ILLEGAL_CHARS.contains(c)).count();
        let sanitized = sanitize_name(mixed);
        assert_eq!(sanitized.matches(REPLACEMENT).count(), substitutions);
        assert_eq!(sanitized.chars().count(), mixed.chars().count());
    }

    #[test]
    fn test_note_file_name_avoids_doubled_extensions() {
        assert_eq!(note_file_name("todo.txt", NOTE_EXTENSION), "todo.snote");
        assert_eq!(note_file_name("todo.snote", NOTE_EXTENSION), "todo.snote");
        assert_eq!(note_file_name("todo", TEXT_EXTENSION), "todo.txt");
        assert_eq!(note_file_name("todo.txt", TEXT_EXTENSION), "todo.txt");
        assert_eq!(note_file_name("a/b.md", NOTE_EXTENSION), "a_b.md.snote");
    }

    #[test]
    fn test_folder_dir_name_never_escapes() {
        assert_eq!(folder_dir_name(".."), "__");
        assert_eq!(folder_dir_name("."), "_");
        assert_eq!(folder_dir_name("../x"), ".._x");
        assert_eq!(folder_dir_name("Work"), "Work");
    }
}

//! Whitespace-separated edge list files

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::data::{EdgeList, NodeInterner};
use crate::error::{Error, Result};

/// Read buffer size for edge list files
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Load `src dst` pairs, one per line. Blank lines and `#` comments are skipped.
pub fn load_edge_list(path: &str, interner: &mut NodeInterner) -> Result<EdgeList> {
    log::info!("Reading edge list: {}", path);

    let file = File::open(path)?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    parse_edge_list(reader, interner)
}

pub fn parse_edge_list<R: BufRead>(reader: R, interner: &mut NodeInterner) -> Result<EdgeList> {
    let mut edges = EdgeList::default();
    let mut self_loops = 0usize;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(Error::Parse {
                line: line_idx + 1,
                message: format!("expected two node ids, found '{}'", content),
            });
        }

        if !edges.push(interner, tokens[0], tokens[1]) {
            self_loops += 1;
        }
    }

    if self_loops > 0 {
        log::info!("Dropped {} self-loops", self_loops);
    }
    log::info!("Loaded {} edges over {} nodes", edges.len(), interner.len());

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_edge_list() {
        let input = "# comment\n1 2\n\n2 3 extra\n3 3\n4\t1 # trailing\n";
        let mut interner = NodeInterner::new();

        let edges = parse_edge_list(Cursor::new(input), &mut interner).unwrap();

        assert_eq!(edges.edges, vec![(0, 1), (1, 2), (3, 0)]);
        assert_eq!(interner.names(), &["1", "2", "3", "4"]);
    }

    #[test]
    fn test_parse_error_line() {
        let mut interner = NodeInterner::new();
        let err = parse_edge_list(Cursor::new("1 2\nlonely\n"), &mut interner).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a b\nb c").unwrap();

        let mut interner = NodeInterner::new();
        let edges = load_edge_list(file.path().to_str().unwrap(), &mut interner).unwrap();
        assert_eq!(edges.len(), 2);
    }
}

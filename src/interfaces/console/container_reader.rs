use crate::domain::certificate::Container;
use regex::Regex;
use std::sync::LazyLock;

// `<reader prefix><name> | <unique name>`, e.g.
// `\\.\HDIMAGE\my-key|\\.\HDIMAGE\HDIMAGE\\my-key.000\1A2B`
static CONTAINER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((\\\\\.\\[^\\]+?\\)(.*?))\s*\|\s*(.*?)\s*$").expect("container pattern")
});

/// Parses the output of a fully qualified, unique-name container listing.
///
/// Lines that do not look like a container entry (banners, status codes)
/// are skipped.
pub fn read_containers(output: &str) -> Vec<Container> {
    output.lines().filter_map(parse_container_line).collect()
}

fn parse_container_line(line: &str) -> Option<Container> {
    let captures = CONTAINER_LINE.captures(line)?;
    let name = captures.get(1)?.as_str();
    let prefix = captures.get(2)?.as_str();
    let unique = captures.get(4)?.as_str();

    Some(Container {
        id: unique.replace(prefix, ""),
        name: name.to_string(),
    })
}

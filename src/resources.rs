use std::fmt;

/// Hardware allocation bound to a named resource shortcut.
///
/// A preset overwrites exactly these five fields of a job
/// configuration; tuning parameters are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePreset {
    pub name: &'static str,
    pub partition: &'static str,
    pub nodes: u32,
    pub ntasks_per_node: u32,
    pub mem_per_cpu: u32,
    pub processors: u32,
}

/// Fixed preset table. Each entry is (short code, long name, preset).
const PRESETS: &[(&str, &str, ResourcePreset)] = &[
    (
        "S",
        "small",
        ResourcePreset {
            name: "small",
            partition: "long",
            nodes: 2,
            ntasks_per_node: 6,
            mem_per_cpu: 24,
            processors: 48,
        },
    ),
    (
        "M",
        "medium",
        ResourcePreset {
            name: "medium",
            partition: "long",
            nodes: 10,
            ntasks_per_node: 6,
            mem_per_cpu: 24,
            processors: 240,
        },
    ),
    (
        "L",
        "large",
        ResourcePreset {
            name: "large",
            partition: "long",
            nodes: 20,
            ntasks_per_node: 6,
            mem_per_cpu: 24,
            processors: 480,
        },
    ),
    (
        "XL",
        "extra-large",
        ResourcePreset {
            name: "extra-large",
            partition: "long",
            nodes: 40,
            ntasks_per_node: 6,
            mem_per_cpu: 24,
            processors: 960,
        },
    ),
    (
        "PHI",
        "phi",
        ResourcePreset {
            name: "phi",
            partition: "accel",
            nodes: 1,
            ntasks_per_node: 16,
            mem_per_cpu: 128,
            processors: 32,
        },
    ),
    (
        "JUMBO",
        "jumbo",
        ResourcePreset {
            name: "jumbo",
            partition: "accel",
            nodes: 4,
            ntasks_per_node: 16,
            mem_per_cpu: 128,
            processors: 128,
        },
    ),
];

/// Look up a preset by short code or long name, ignoring case.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::resources::lookup;
///
/// let preset = lookup("phi").unwrap();
/// assert_eq!(preset.partition, "accel");
/// assert!(lookup("huge").is_none());
/// ```
pub fn lookup(name: &str) -> Option<ResourcePreset> {
    let name = name.trim();

    PRESETS
        .iter()
        .find(|(code, long, _)| code.eq_ignore_ascii_case(name) || long.eq_ignore_ascii_case(name))
        .map(|(_, _, preset)| *preset)
}

/// Names accepted by [`lookup`], short codes first.
pub fn names() -> Vec<&'static str> {
    PRESETS
        .iter()
        .map(|(code, _, _)| *code)
        .chain(PRESETS.iter().map(|(_, long, _)| *long))
        .collect()
}

impl fmt::Display for ResourcePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (partition={}, nodes={}, ntasks-per-node={}, mem-per-cpu={}G, processors={})",
            self.name,
            self.partition,
            self.nodes,
            self.ntasks_per_node,
            self.mem_per_cpu,
            self.processors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(p: ResourcePreset) -> (&'static str, u32, u32, u32, u32) {
        (p.partition, p.nodes, p.ntasks_per_node, p.mem_per_cpu, p.processors)
    }

    #[test]
    fn test_lookup_documented_tuples() {
        let expected = [
            ("S", ("long", 2, 6, 24, 48)),
            ("M", ("long", 10, 6, 24, 240)),
            ("L", ("long", 20, 6, 24, 480)),
            ("XL", ("long", 40, 6, 24, 960)),
            ("PHI", ("accel", 1, 16, 128, 32)),
            ("JUMBO", ("accel", 4, 16, 128, 128)),
        ];

        for (name, values) in expected {
            let preset = lookup(name).expect("preset should exist");
            assert_eq!(tuple(preset), values, "preset {}", name);
        }
    }

    #[test]
    fn test_lookup_long_names_match_short_codes() {
        for (code, long, _) in PRESETS {
            assert_eq!(lookup(code), lookup(long));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("small"), lookup("S"));
        assert_eq!(lookup("s"), lookup("SMALL"));
        assert_eq!(lookup("xl"), lookup("Extra-Large"));
        assert_eq!(lookup("Jumbo").map(|p| p.processors), Some(128));
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        assert!(lookup("XXL").is_none());
        assert!(lookup("").is_none());
        assert!(lookup("gpu").is_none());
    }

    #[test]
    fn test_names_cover_all_presets() {
        let names = names();
        assert_eq!(names.len(), PRESETS.len() * 2);
        assert!(names.iter().all(|n| lookup(n).is_some()));
    }
}

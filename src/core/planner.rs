use crate::models::content::ContentRoot;
use crate::models::paths::GamePathRules;
use camino::{Utf8Path, Utf8PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployKind {
    /// Whole-tree copy; an existing destination is removed first.
    Directory,
    File,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployOp {
    pub source: Utf8PathBuf,
    pub destination: Utf8PathBuf,
    pub kind: DeployKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeployPlan {
    pub ops: Vec<DeployOp>,
    /// Registry names (json file stems) contributed by the plan, in plan order.
    pub registry_entries: Vec<String>,
}

impl DeployPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Paths and registry names to revert for a recorded deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    pub registry_entries: Vec<String>,
    pub paths: Vec<Utf8PathBuf>,
}

/// Registry name of a json file: its name without the extension.
pub fn registry_name(file_name: &str) -> String {
    Utf8Path::new(file_name)
        .file_stem()
        .unwrap_or(file_name)
        .to_string()
}

fn folder_name(dir: &Utf8Path) -> &str {
    dir.file_name().unwrap_or(dir.as_str())
}

/// Maps one content root to its copy operations.
pub fn plan(root: &ContentRoot, rules: &GamePathRules) -> DeployPlan {
    let registry_file = rules.json_registry.file_name().unwrap_or_default();

    match root {
        ContentRoot::Paks(r) => DeployPlan {
            ops: vec![DeployOp {
                source: r.dir.clone(),
                destination: rules.paks_mods.join(folder_name(&r.dir)),
                kind: DeployKind::Directory,
            }],
            registry_entries: Vec::new(),
        },
        ContentRoot::General(r) => DeployPlan {
            ops: vec![DeployOp {
                source: r.dir.clone(),
                destination: rules.mods.join(folder_name(&r.dir)),
                kind: DeployKind::Directory,
            }],
            registry_entries: Vec::new(),
        },
        ContentRoot::Json(r) => {
            let files: Vec<&String> = r
                .files
                .iter()
                .filter(|f| !f.eq_ignore_ascii_case(registry_file))
                .collect();

            DeployPlan {
                ops: files
                    .iter()
                    .map(|f| DeployOp {
                        source: r.dir.join(f.as_str()),
                        destination: rules.json_dir.join(f.as_str()),
                        kind: DeployKind::File,
                    })
                    .collect(),
                registry_entries: files.iter().map(|f| registry_name(f)).collect(),
            }
        }
    }
}

/// Concatenates the plans of every root, keeping root order.
pub fn plan_all(roots: &[ContentRoot], rules: &GamePathRules) -> DeployPlan {
    roots.iter().map(|r| plan(r, rules)).fold(
        DeployPlan::default(),
        |mut acc, mut p| {
            acc.ops.append(&mut p.ops);
            for entry in p.registry_entries {
                if !acc.registry_entries.contains(&entry) {
                    acc.registry_entries.push(entry);
                }
            }
            acc
        },
    )
}

/// Derives what to undo from a ledger. Json files sitting directly in `json_dir`
/// contribute their stems to the registry removal; every path is deleted.
pub fn plan_removal(ledger: &[Utf8PathBuf], json_dir: &Utf8Path) -> RemovalPlan {
    let registry_entries = ledger
        .iter()
        .filter(|p| p.parent() == Some(json_dir))
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")))
        .filter_map(|p| p.file_name().map(registry_name))
        .collect();

    RemovalPlan {
        registry_entries,
        paths: ledger.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::{GeneralRoot, JsonRoot, PaksRoot};

    fn rules() -> GamePathRules {
        GamePathRules::new(Utf8Path::new("/game"))
    }

    #[test]
    fn test_destinations_per_kind() {
        let roots = vec![
            ContentRoot::Paks(PaksRoot {
                dir: "/lib/Goku/paks".into(),
            }),
            ContentRoot::Json(JsonRoot {
                dir: "/lib/Goku/data".into(),
                files: vec!["A.json".into(), "JsonFiles.json".into()],
            }),
            ContentRoot::General(GeneralRoot {
                dir: "/lib/Goku/ue4ss".into(),
            }),
        ];

        let plan = plan_all(&roots, &rules());
        let dests: Vec<&str> = plan.ops.iter().map(|o| o.destination.as_str()).collect();
        assert_eq!(
            dests,
            vec![
                "/game/SparkingZERO/Content/Paks/~mods/paks",
                "/game/SparkingZERO/Mods/ZeroSpark/Json/A.json",
                "/game/SparkingZERO/Mods/ue4ss",
            ]
        );
        assert_eq!(plan.ops[1].kind, DeployKind::File);
        assert_eq!(plan.registry_entries, vec!["A"]);
    }

    #[test]
    fn test_removal_only_counts_json_in_json_dir() {
        let rules = rules();
        let ledger = vec![
            rules.json_dir.join("A.json"),
            rules.mods.join("Other").join("B.json"),
            rules.paks_mods.join("pak"),
        ];

        let removal = plan_removal(&ledger, &rules.json_dir);
        assert_eq!(removal.registry_entries, vec!["A"]);
        assert_eq!(removal.paths, ledger);
    }
}

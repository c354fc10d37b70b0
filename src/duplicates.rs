use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use clap::ValueEnum;
use colored::Colorize;
use indicatif::{HumanBytes, HumanCount, ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hasher::{Digest, HashStrategy, content_digest};
use crate::scanner::CandidateFile;
use crate::signal::Cancellation;

/// Which member of a duplicate group is left unselected.
///
/// Nothing here can tell which copy is the "original"; the policy only
/// decides which copy the default selection keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KeepPolicy {
    /// The first copy in traversal order.
    #[default]
    FirstSeen,
    /// The copy with the oldest modification time.
    Oldest,
    /// The copy with the shortest path.
    ShortestPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub selected: bool,
}

/// Files confirmed to share both size and digest.
///
/// The first member is the keeper and the only one not selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub id: String,
    pub size: u64,
    pub files: Vec<GroupMember>,
}

impl DuplicateGroup {
    pub fn selected_paths(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.path.as_path())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupOutcome {
    pub groups: Vec<DuplicateGroup>,
    /// Files dropped because they could not be hashed.
    pub hash_failures: u64,
}

/// Buckets `items` by `key`, keeping buckets in the order their key was
/// first seen.
fn partition<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<(K, Vec<T>)>
where
    K: std::hash::Hash + Eq + Copy,
    F: FnMut(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => buckets[i].1.push(item),
            None => {
                index.insert(k, buckets.len());
                buckets.push((k, vec![item]));
            }
        }
    }
    buckets
}

fn keeper_index(paths: &[PathBuf], policy: KeepPolicy) -> usize {
    match policy {
        KeepPolicy::FirstSeen => 0,
        KeepPolicy::Oldest => {
            let mtime = |p: &PathBuf| {
                p.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or_else(|_| SystemTime::now())
            };
            // min_by_key keeps the first of equal keys, so ties go to traversal order.
            paths
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| mtime(*p))
                .map_or(0, |(i, _)| i)
        }
        KeepPolicy::ShortestPath => paths
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.as_os_str().len())
            .map_or(0, |(i, _)| i),
    }
}

fn build_group(id: usize, size: u64, mut paths: Vec<PathBuf>, policy: KeepPolicy) -> DuplicateGroup {
    let keeper = keeper_index(&paths, policy);
    let kept = paths.remove(keeper);
    paths.insert(0, kept);

    let group_id = format!("group-{id}");
    let files = paths
        .into_iter()
        .enumerate()
        .map(|(idx, path)| GroupMember {
            id: format!("{group_id}-{idx}"),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path,
            selected: idx > 0,
        })
        .collect();

    DuplicateGroup {
        id: group_id,
        size,
        files,
    }
}

/// Groups candidates by size, then by content digest.
///
/// Groups come back in first-seen order and are numbered `group-1`,
/// `group-2`, ... within this call only. Files that cannot be read are
/// left out of their group.
pub fn find_duplicates(
    files: Vec<CandidateFile>,
    strategy: &HashStrategy,
    policy: KeepPolicy,
    cancel: &Cancellation,
) -> Result<GroupOutcome> {
    info!("Finding duplicates...");

    let size_groups: Vec<_> = partition(files, |f| f.size)
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .collect();

    let to_hash: u64 = size_groups.iter().map(|(_, g)| g.len() as u64).sum();
    info!(
        "{} files share a size with another file",
        HumanCount(to_hash)
    );

    let pb = ProgressBar::new(to_hash);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut outcome = GroupOutcome::default();
    let mut next_id = 1;

    for (size, group) in size_groups {
        let mut digests: Vec<(Digest, PathBuf)> = Vec::with_capacity(group.len());
        for file in group {
            if let Err(e) = cancel.check() {
                pb.finish_and_clear();
                return Err(e);
            }
            match content_digest(&file.path, size, strategy) {
                Ok(digest) => digests.push((digest, file.path)),
                Err(e) => {
                    warn!("Failed to calculate hash for '{}': {}", file.path.display(), e);
                    outcome.hash_failures += 1;
                }
            }
            pb.inc(1);
        }

        for (_, same) in partition(digests, |(digest, _)| *digest) {
            if same.len() < 2 {
                continue;
            }
            let paths = same.into_iter().map(|(_, path)| path).collect();
            outcome.groups.push(build_group(next_id, size, paths, policy));
            next_id += 1;
        }
    }
    pb.finish_and_clear();

    info!(
        "Duplicate analysis complete: {} groups, {} hash failures",
        HumanCount(outcome.groups.len() as u64),
        outcome.hash_failures
    );

    Ok(outcome)
}

/// Bytes freed if every selected member were removed.
pub fn wasted_space(groups: &[DuplicateGroup]) -> u64 {
    groups
        .iter()
        .map(|g| g.size * g.files.iter().filter(|f| f.selected).count() as u64)
        .sum()
}

pub fn print_results(groups: &[DuplicateGroup], base_path: &Path) {
    if groups.is_empty() {
        println!("{}", "No duplicate files found!".green());
        return;
    }
    let total_duplicates: usize = groups.iter().map(|g| g.files.len() - 1).sum();

    println!(
        "Found {} duplicate files wasting {} of space",
        HumanCount(total_duplicates as u64).to_string().yellow(),
        HumanBytes(wasted_space(groups)).to_string().yellow()
    );

    // Largest savings first
    let mut sorted: Vec<&DuplicateGroup> = groups.iter().collect();
    sorted.sort_by_key(|g| std::cmp::Reverse(g.size * (g.files.len() - 1) as u64));

    for group in sorted {
        println!(
            "\n{} ({}, {} files):",
            group.id.bold(),
            HumanBytes(group.size),
            group.files.len()
        );
        for file in &group.files {
            let relative = file.path.strip_prefix(base_path).unwrap_or(&file.path);
            if file.selected {
                println!("  {} {}", "-".red(), relative.display());
            } else {
                println!("  {} {}", "keep".green(), relative.display());
            }
        }
    }
}

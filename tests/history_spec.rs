use std::fs;
use std::path::Path;

use chrono::Utc;
use forgekit_stories::hash::content_hash;
use forgekit_stories::history::{self, MAX_VERSIONS_PER_STORY};
use forgekit_stories::models::*;
use speculate2::speculate;

fn event(story_path: &str, content: &str, action: StoryAction) -> NewHistoryEntry {
    NewHistoryEntry {
        story_path: story_path.to_string(),
        component_path: story_path.replace(".stories", ""),
        generated_at: Utc::now(),
        story_hash: content_hash(content),
        action,
    }
}

fn record_n(root: &Path, story_path: &str, n: usize) {
    for i in 0..n {
        let action = if i == 0 {
            StoryAction::Created
        } else {
            StoryAction::Updated
        };
        history::record(root, event(story_path, &format!("revision {}", i + 1), action));
    }
}

fn versions(root: &Path, story_path: &str) -> Vec<u32> {
    history::versions_for(root, story_path)
        .iter()
        .map(|e| e.version)
        .collect()
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();
    }

    describe "load" {
        it "returns an empty ledger when no file exists" {
            let ledger = history::load(root);
            assert_eq!(ledger, StoryHistory::default());
            assert_eq!(ledger.schema_version, "1");
            assert!(ledger.entries.is_empty());
        }

        it "treats a corrupted file as empty" {
            let path = history::history_path(root);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "{ this is not json").unwrap();

            assert_eq!(history::load(root), StoryHistory::default());
        }

        it "treats an unknown schema version as empty" {
            let path = history::history_path(root);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, r#"{ "schemaVersion": "2", "entries": {} }"#).unwrap();

            assert_eq!(history::load(root), StoryHistory::default());
        }

        it "reads ledgers written by other tools" {
            let path = history::history_path(root);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, r#"{
  "schemaVersion": "1",
  "entries": {
    "src/Button.stories.tsx": [
      {
        "storyPath": "src/Button.stories.tsx",
        "componentPath": "src/Button.tsx",
        "version": 4,
        "generatedAt": "2024-05-01T12:30:00.000Z",
        "storyHash": "abc123",
        "action": "merged"
      }
    ]
  }
}"#).unwrap();

            let entries = history::versions_for(root, "src/Button.stories.tsx");
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].version, 4);
            assert_eq!(entries[0].action, StoryAction::Merged);
            assert_eq!(entries[0].component_path, "src/Button.tsx");

            history::record(root, event("src/Button.stories.tsx", "next", StoryAction::Updated));
            assert_eq!(versions(root, "src/Button.stories.tsx"), vec![4, 5]);
        }
    }

    describe "record" {
        it "starts at version 1 and creates the ledger lazily" {
            assert!(!history::history_path(root).exists());

            history::record(root, event("src/Button.stories.tsx", "v1", StoryAction::Created));

            assert!(history::history_path(root).exists());
            let entries = history::versions_for(root, "src/Button.stories.tsx");
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].version, 1);
            assert_eq!(entries[0].action, StoryAction::Created);
            assert_eq!(entries[0].story_hash, content_hash("v1"));
        }

        it "numbers events 1..N in order" {
            record_n(root, "src/Button.stories.tsx", 5);
            assert_eq!(versions(root, "src/Button.stories.tsx"), vec![1, 2, 3, 4, 5]);
        }

        it "keeps independent sequences per story path" {
            record_n(root, "src/Button.stories.tsx", 3);
            record_n(root, "src/Card.stories.tsx", 2);
            history::record(root, event("src/Button.stories.tsx", "again", StoryAction::Merged));

            assert_eq!(versions(root, "src/Button.stories.tsx"), vec![1, 2, 3, 4]);
            assert_eq!(versions(root, "src/Card.stories.tsx"), vec![1, 2]);
        }

        it "retains only the 10 most recent versions" {
            record_n(root, "src/Button.stories.tsx", 12);

            let entries = history::versions_for(root, "src/Button.stories.tsx");
            assert_eq!(entries.len(), MAX_VERSIONS_PER_STORY);
            assert_eq!(versions(root, "src/Button.stories.tsx"), (3..=12).collect::<Vec<u32>>());
            assert_eq!(entries.last().unwrap().story_hash, content_hash("revision 12"));
        }

        it "continues numbering after pruning" {
            record_n(root, "src/Button.stories.tsx", 15);
            history::record(root, event("src/Button.stories.tsx", "next", StoryAction::Updated));

            assert_eq!(versions(root, "src/Button.stories.tsx"), (7..=16).collect::<Vec<u32>>());
        }

        it "loses no entries when threads record concurrently" {
            let paths = [
                "src/Button.stories.tsx",
                "src/Card.stories.tsx",
                "src/Input.stories.tsx",
                "src/Modal.stories.tsx",
            ];

            std::thread::scope(|scope| {
                for t in 0..16 {
                    let story_path = paths[t % paths.len()];
                    scope.spawn(move || {
                        for i in 0..5 {
                            let content = format!("thread {} revision {}", t, i);
                            history::record(root, event(story_path, &content, StoryAction::Updated));
                        }
                    });
                }
            });

            // 4 threads x 5 events per path: 20 recorded, newest 10 retained.
            for story_path in paths {
                assert_eq!(versions(root, story_path), (11..=20).collect::<Vec<u32>>());
            }
        }

        it "recovers from a corrupted ledger by starting over" {
            let path = history::history_path(root);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "garbage").unwrap();

            history::record(root, event("src/Button.stories.tsx", "v1", StoryAction::Created));
            assert_eq!(versions(root, "src/Button.stories.tsx"), vec![1]);
        }

        it "writes the ledger in the documented JSON shape" {
            history::record(root, event("src/Button.stories.tsx", "v1", StoryAction::Created));

            let raw = fs::read_to_string(history::history_path(root)).unwrap();
            let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

            assert_eq!(json["schemaVersion"], "1");
            let entry = &json["entries"]["src/Button.stories.tsx"][0];
            assert_eq!(entry["storyPath"], "src/Button.stories.tsx");
            assert_eq!(entry["componentPath"], "src/Button.tsx");
            assert_eq!(entry["version"], 1);
            assert_eq!(entry["storyHash"], content_hash("v1"));
            assert_eq!(entry["action"], "created");
            assert!(entry["generatedAt"].is_string());
        }

        it "does not fail when the ledger cannot be written" {
            // A file where the .forgekit directory should be makes every write fail.
            fs::write(root.join(".forgekit"), "blocking file").unwrap();

            history::record(root, event("src/Button.stories.tsx", "v1", StoryAction::Created));
            assert!(history::versions_for(root, "src/Button.stories.tsx").is_empty());
        }
    }

    describe "versions_for" {
        it "returns nothing for an unknown story" {
            record_n(root, "src/Button.stories.tsx", 2);
            assert!(history::versions_for(root, "src/Missing.stories.tsx").is_empty());
        }
    }

    describe "latest_for" {
        it "returns the newest entry" {
            record_n(root, "src/Button.stories.tsx", 3);
            let latest = history::latest_for(root, "src/Button.stories.tsx").unwrap();
            assert_eq!(latest.version, 3);
            assert_eq!(latest.story_hash, content_hash("revision 3"));
        }

        it "returns None without history" {
            assert!(history::latest_for(root, "src/Button.stories.tsx").is_none());
        }
    }
}

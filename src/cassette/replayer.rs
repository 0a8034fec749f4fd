//! Replays recorded interactions from a cassette.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use super::format::{Cassette, Interaction};
use super::PUBLISHER_PORT_PREFIX;

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Read and parse a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error naming the path if the file cannot be read or is not
    /// a valid cassette.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Invalid cassette {}: {e}", path.display()))?;
        Ok(Self::new(&cassette))
    }

    /// Names of the publishers that appear in the cassette, sorted.
    #[must_use]
    pub fn publisher_names(&self) -> Vec<String> {
        self.queues
            .keys()
            .filter_map(|k| k.port.strip_prefix(PUBLISHER_PORT_PREFIX))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Input of the first interaction recorded for a port and method.
    #[must_use]
    pub fn first_input(&self, port: &str, method: &str) -> Option<&serde_json::Value> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };
        self.queues.get(&key).and_then(|q| q.first()).map(|i| &i.input)
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the
    /// given port/method combination.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<&Interaction, String> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            ));
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        if *cursor >= queue.len() {
            return Err(format!(
                "Cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
                 have been consumed.",
                count = queue.len(),
            ));
        }

        let interaction = &queue[*cursor];
        *cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    fn interaction(seq: u64, port: &str, method: &str) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: json!({}),
            output: json!({"Ok": null}),
        }
    }

    #[test]
    fn replay_in_order() {
        let cassette = make_cassette(vec![
            interaction(0, "image_generator", "generate_image"),
            interaction(1, "image_generator", "generate_image"),
        ]);

        let mut replayer = CassetteReplayer::new(&cassette);

        let i1 = replayer.next_interaction("image_generator", "generate_image").unwrap();
        assert_eq!(i1.seq, 0);

        let i2 = replayer.next_interaction("image_generator", "generate_image").unwrap();
        assert_eq!(i2.seq, 1);
    }

    #[test]
    fn exhausted_replayer_errors() {
        let cassette = make_cassette(vec![interaction(0, "news_source", "main_article")]);

        let mut replayer = CassetteReplayer::new(&cassette);
        assert!(replayer.next_interaction("news_source", "main_article").is_ok());
        let err = replayer.next_interaction("news_source", "main_article").unwrap_err();
        assert!(err.contains("have been consumed"));
    }

    #[test]
    fn unknown_port_errors() {
        let cassette = make_cassette(vec![]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let err = replayer.next_interaction("unknown", "method").unwrap_err();
        assert!(err.contains("no interactions recorded"));
    }

    #[test]
    fn load_reads_yaml_from_disk() {
        let dir = std::env::temp_dir().join("newsgen_cassette_load_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.cassette.yaml");
        let mut recorded = interaction(0, "image_generator", "generate_image");
        recorded.output = json!({"Ok": "https://images.example.com/cat.png"});
        std::fs::write(&path, serde_yaml::to_string(&make_cassette(vec![recorded])).unwrap()).unwrap();

        let mut replayer = CassetteReplayer::load(&path).unwrap();
        let i = replayer.next_interaction("image_generator", "generate_image").unwrap();
        assert_eq!(i.output, json!({"Ok": "https://images.example.com/cat.png"}));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let err = CassetteReplayer::load(Path::new("/nonexistent/cassette.yaml")).err().unwrap();
        assert!(err.contains("Cannot read /nonexistent/cassette.yaml"));

        let path = std::env::temp_dir().join("newsgen_cassette_malformed.yaml");
        std::fs::write(&path, "interactions: 3").unwrap();
        let err = CassetteReplayer::load(&path).err().unwrap();
        assert!(err.contains("Invalid cassette"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn publisher_names_come_from_ports() {
        let cassette = make_cassette(vec![
            interaction(0, "news_source", "main_article"),
            interaction(1, "publisher.x", "publish"),
            interaction(2, "publisher.instagram", "publish"),
            interaction(3, "publisher.x", "publish"),
        ]);
        let replayer = CassetteReplayer::new(&cassette);
        assert_eq!(replayer.publisher_names(), ["instagram", "x"]);
    }
}

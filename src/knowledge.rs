use log::debug;

/// Keywords checked against both the stored sentence and the user message
/// when no topic matched directly.
const TRIGGER_KEYWORDS: [&str; 6] = [
    "mot de passe",
    "phishing",
    "email",
    "malware",
    "sécurité",
    "données",
];

/// Marker returned when nothing in the knowledge base matched the query.
pub const NO_CONTENT_FOUND: &str =
    "Aucun contenu spécifique trouvé dans la base de connaissances.";

/// Static, in-process knowledge base: topic name mapped to an ordered list
/// of advisory sentences. Insertion order is priority order, both for the
/// sentences within a topic and for the topics themselves during scanning.
pub struct KnowledgeBase {
    topics: Vec<(&'static str, Vec<&'static str>)>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            topics: vec![
                ("PHISHING", vec![
                    "Le phishing est une technique d'escroquerie par email ou SMS visant à obtenir des informations personnelles.",
                    "Vérifiez toujours l'expéditeur avant de cliquer sur un lien dans un email.",
                    "Les emails de phishing contiennent souvent des fautes d'orthographe et un ton urgent.",
                    "Ne jamais fournir de mot de passe ou informations bancaires par email.",
                ]),
                ("PASSWORDS", vec![
                    "Un mot de passe fort contient au moins 12 caractères avec majuscules, minuscules, chiffres et symboles.",
                    "Utilisez un mot de passe unique pour chaque compte.",
                    "Activez l'authentification à deux facteurs (2FA) partout où c'est possible.",
                    "Utilisez un gestionnaire de mots de passe pour stocker vos mots de passe en sécurité.",
                ]),
                ("MALWARE", vec![
                    "Les malwares incluent les virus, trojans, ransomwares et spywares.",
                    "Ne téléchargez jamais de fichiers depuis des sources non fiables.",
                    "Maintenez votre antivirus à jour.",
                    "Soyez prudent avec les clés USB trouvées ou reçues.",
                ]),
                ("SOCIAL_ENGINEERING", vec![
                    "L'ingénierie sociale exploite la psychologie humaine plutôt que des failles techniques.",
                    "Vérifiez toujours l'identité des personnes demandant des informations sensibles.",
                    "Soyez sceptique face aux demandes urgentes ou inhabituelles.",
                ]),
                ("NETWORK_SECURITY", vec![
                    "Utilisez un VPN sur les réseaux WiFi publics.",
                    "Assurez-vous que votre routeur utilise WPA3 ou au minimum WPA2.",
                    "Changez les mots de passe par défaut de vos équipements réseau.",
                ]),
                ("DATA_PROTECTION", vec![
                    "Chiffrez les données sensibles au repos et en transit.",
                    "Effectuez des sauvegardes régulières suivant la règle 3-2-1.",
                    "Appliquez le principe du moindre privilège pour l'accès aux données.",
                ]),
            ],
        }
    }
}

impl KnowledgeBase {
    /// Sentences stored for `topic`, in priority order.
    pub fn get(&self, topic: &str) -> Option<&[&'static str]> {
        self.topics
            .iter()
            .find(|(name, _)| *name == topic)
            .map(|(_, items)| items.as_slice())
    }

    /// Retrieve up to `limit` relevant sentences as a bulleted block.
    ///
    /// Precedence: an explicit known topic wins outright; otherwise topics
    /// whose name appears in the message contribute up to two sentences
    /// each, then keyword overlap between sentence and message fills the
    /// remaining slots. Returns [`NO_CONTENT_FOUND`] when nothing matched.
    pub fn retrieve(&self, message: &str, topic: Option<&str>, limit: usize) -> String {
        if let Some(topic) = topic {
            if let Some(items) = self.get(topic) {
                return bulleted(&items[..items.len().min(limit)]);
            }
        }

        let message_lower = message.to_lowercase();
        let mut selected: Vec<&str> = Vec::new();

        for (name, items) in &self.topics {
            if message_lower.contains(&name.to_lowercase()) {
                selected.extend(items.iter().copied().take(2));
            }
        }

        for (_, items) in &self.topics {
            for &item in items {
                if selected.len() >= limit {
                    break;
                }
                let item_lower = item.to_lowercase();
                let overlaps = TRIGGER_KEYWORDS
                    .iter()
                    .any(|kw| item_lower.contains(kw) && message_lower.contains(kw));
                if overlaps && !selected.contains(&item) {
                    selected.push(item);
                }
            }
        }

        if selected.is_empty() {
            debug!("No knowledge base match for message");
            return NO_CONTENT_FOUND.to_string();
        }

        selected.truncate(limit);
        bulleted(&selected)
    }
}

fn bulleted(items: &[&str]) -> String {
    format!("\n- {}", items.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_topic_returns_sentences_in_stored_order() {
        let kb = KnowledgeBase::default();
        for (topic, expected_len) in [
            ("PHISHING", 4usize),
            ("PASSWORDS", 4),
            ("MALWARE", 4),
            ("SOCIAL_ENGINEERING", 3),
            ("NETWORK_SECURITY", 3),
            ("DATA_PROTECTION", 3),
        ] {
            let block = kb.retrieve("peu importe", Some(topic), 3);
            let lines: Vec<&str> = block
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| l.trim_start_matches("- "))
                .collect();
            assert_eq!(lines.len(), 3.min(expected_len), "topic {topic}");
            let stored = kb.get(topic).unwrap();
            for (line, sentence) in lines.iter().zip(stored.iter()) {
                assert_eq!(line, sentence, "topic {topic}");
            }
        }
    }

    #[test]
    fn explicit_topic_caps_at_available_sentences() {
        let kb = KnowledgeBase::default();
        let block = kb.retrieve("", Some("NETWORK_SECURITY"), 10);
        assert_eq!(block.matches("\n- ").count(), 3);
    }

    #[test]
    fn unknown_topic_falls_through_to_scanning() {
        let kb = KnowledgeBase::default();
        let block = kb.retrieve("parlez-moi du phishing", Some("QUANTUM"), 3);
        assert!(block.contains("phishing") || block.contains("Phishing"));
        assert_ne!(block, NO_CONTENT_FOUND);
    }

    #[test]
    fn topic_name_in_message_contributes_two_sentences() {
        let kb = KnowledgeBase::default();
        let block = kb.retrieve("Que savez-vous sur les malware ?", None, 2);
        let stored = kb.get("MALWARE").unwrap();
        assert!(block.contains(stored[0]));
        assert!(block.contains(stored[1]));
    }

    #[test]
    fn password_keyword_surfaces_passwords_sentences() {
        let kb = KnowledgeBase::default();
        let block = kb.retrieve("Comment créer un mot de passe fort?", None, 3);
        let passwords = kb.get("PASSWORDS").unwrap();
        assert!(
            passwords.iter().any(|s| block.contains(s)),
            "expected at least one PASSWORDS sentence in: {block}"
        );
    }

    #[test]
    fn no_match_yields_marker() {
        let kb = KnowledgeBase::default();
        let block = kb.retrieve("quelle heure est-il", None, 3);
        assert_eq!(block, NO_CONTENT_FOUND);
    }

    #[test]
    fn keyword_matches_are_deduplicated_and_capped() {
        let kb = KnowledgeBase::default();
        let block = kb.retrieve("un email suspect parle de mot de passe et de sécurité", None, 3);
        assert_eq!(block.matches("\n- ").count(), 3);
        let lines: Vec<&str> = block.lines().filter(|l| !l.is_empty()).collect();
        let mut deduped = lines.clone();
        deduped.dedup();
        assert_eq!(lines, deduped);
    }
}

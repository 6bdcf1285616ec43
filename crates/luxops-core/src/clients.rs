use crate::Client;

/// The concierge client list plus which client the dashboard is working for.
#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: Vec<Client>,
    selected: Option<String>,
}

impl ClientDirectory {
    pub fn new(clients: Vec<Client>) -> Self {
        let selected = clients.first().map(|c| c.id.clone());
        Self { clients, selected }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Case-insensitive match on client name or event name. Empty term matches all.
    pub fn search(&self, term: &str) -> Vec<&Client> {
        let needle = term.trim().to_lowercase();
        self.clients
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || c.name.to_lowercase().contains(&needle)
                    || c.event_name.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selected client, else the first one.
    pub fn active(&self) -> Option<&Client> {
        self.selected
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.clients.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn search_matches_name_or_event() {
        let dir = ClientDirectory::new(demo::clients());
        let ids = |term: &str| -> Vec<String> {
            dir.search(term).iter().map(|c| c.id.clone()).collect()
        };
        assert_eq!(ids("techglobal"), vec!["2"]);
        assert_eq!(ids("JUBILEE"), vec!["3"]);
        assert_eq!(ids("").len(), 3);
        assert!(ids("nobody").is_empty());
    }

    #[test]
    fn active_falls_back_to_first() {
        let mut dir = ClientDirectory::new(demo::clients());
        assert_eq!(dir.active().map(|c| c.id.as_str()), Some("1"));
        assert!(dir.select("3"));
        assert_eq!(dir.active().map(|c| c.id.as_str()), Some("3"));
        assert!(!dir.select("99"));
        assert_eq!(dir.selected_id(), Some("3"));
        assert!(ClientDirectory::default().active().is_none());
    }
}

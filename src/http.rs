use std::time::Duration;

// ---------------------------------------------------------------------------
// HttpClients — one reqwest client per outbound concern
// ---------------------------------------------------------------------------

/// The two outbound HTTP clients this service owns.
///
/// Both collaborators get an explicit timeout; a timeout is treated
/// like any other remote failure. The engine client's timeout is
/// longer because activation may fan out work engine-side before it
/// answers, while a generation call is a single provider round-trip.
#[derive(Clone)]
pub struct HttpClients {
    engine: reqwest::Client,
    generation: reqwest::Client,
}

impl HttpClients {
    pub fn new(engine_timeout: Duration, generation_timeout: Duration) -> anyhow::Result<Self> {
        let engine = reqwest::Client::builder().timeout(engine_timeout).build()?;
        let generation = reqwest::Client::builder()
            .timeout(generation_timeout)
            .build()?;
        Ok(Self { engine, generation })
    }

    pub fn engine(&self) -> &reqwest::Client {
        &self.engine
    }

    pub fn generation(&self) -> &reqwest::Client {
        &self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_build_with_distinct_timeouts() {
        let clients =
            HttpClients::new(Duration::from_secs(30), Duration::from_secs(20)).unwrap();
        // clones share the underlying connection pools
        let _ = clients.clone().engine().clone();
        let _ = clients.generation().clone();
    }
}

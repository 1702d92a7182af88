use mongodb::{Client, Database};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::mongo::Mongo;

/// MongoDB container for integration tests.
///
/// The container is removed when this value is dropped.
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    pub client: Client,
    pub connection_string: String,
}

impl TestMongo {
    /// Start a container and connect to it.
    ///
    /// # Panics
    /// Panics if Docker is unavailable or the server cannot be reached.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7.0")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host = container
            .get_host()
            .await
            .expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get port");

        let connection_string = format!("mongodb://{}:{}", host, port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        tracing::debug!(connection_string = %connection_string, "Test MongoDB ready");

        Self {
            container,
            client,
            connection_string,
        }
    }

    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }
}

impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}

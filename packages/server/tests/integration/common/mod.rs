use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use ::common::UploadStore;
use reqwest::Client;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use serde_json::Value;
use tempfile::TempDir;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mysql::Mysql;
use tokio::sync::OnceCell;

use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, IngestConfig, RunEnvironment,
    ServerConfig, UploadConfig,
};
use server::state::AppState;

/// MySQL container shared across all tests in this binary.
static SHARED_MYSQL: OnceCell<(ContainerAsync<Mysql>, u16)> = OnceCell::const_new();

/// Monotonic counter for unique database names.
static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

async fn shared_mysql_port() -> u16 {
    let (_, port) = SHARED_MYSQL
        .get_or_init(|| async {
            let container = Mysql::default()
                .start()
                .await
                .expect("Failed to start MySQL container");
            let port = container
                .get_host_port_ipv4(3306)
                .await
                .expect("Failed to get MySQL port");
            (container, port)
        })
        .await;
    *port
}

pub mod routes {
    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";
    pub const BUYERS: &str = "/api/v1/buyers";
    pub const UPLOAD: &str = "/api/v1/buyers/upload";
    pub const UPLOADS: &str = "/api/v1/buyers/uploads";
    pub const HEALTH: &str = "/api/v1/health";

    pub fn upload(id: i64) -> String {
        format!("/api/v1/buyers/uploads/{id}")
    }
}

/// A running test server backed by its own database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
    _scratch: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_limit(::common::upload::DEFAULT_MAX_FILE_SIZE).await
    }

    pub async fn spawn_with_limit(max_file_size: u64) -> Self {
        let port = shared_mysql_port().await;
        let db_name = format!("test_{}", DB_COUNTER.fetch_add(1, Ordering::Relaxed));

        let admin_db = Database::connect(ConnectOptions::new(format!(
            "mysql://root@127.0.0.1:{port}/mysql"
        )))
        .await
        .expect("Failed to connect to admin database");
        admin_db
            .execute_raw(Statement::from_string(
                DbBackend::MySql,
                format!("CREATE DATABASE `{db_name}`"),
            ))
            .await
            .expect("Failed to create test database");
        drop(admin_db);

        let database = DatabaseConfig {
            url: format!("mysql://root@127.0.0.1:{port}/{db_name}"),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 8,
        };
        let db = server::database::init_db(&database)
            .await
            .expect("Failed to initialize test database");
        server::database::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");

        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");
        let upload_dir = scratch.path().join("uploads");
        let uploads = UploadStore::new(upload_dir.clone(), max_file_size)
            .await
            .expect("Failed to create upload store");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: RunEnvironment::Production,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database,
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
            },
            upload: UploadConfig {
                dir: upload_dir.clone(),
                max_file_size,
            },
            ingest: IngestConfig {
                transaction_timeout_secs: 60,
            },
        };

        let app = server::build_router(AppState {
            db: db.clone(),
            config,
            uploads,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            upload_dir,
            _scratch: scratch,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn upload_with_token(
        &self,
        file_name: &str,
        mime: &str,
        file_bytes: Vec<u8>,
        token: &str,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(self.url(routes::UPLOAD))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Upload a CSV body and return the new upload id.
    pub async fn upload_csv(&self, csv: &str, token: &str) -> i64 {
        let res = self
            .upload_with_token("buyers.csv", "text/csv", csv.as_bytes().to_vec(), token)
            .await;
        assert_eq!(res.status, 200, "upload failed: {}", res.text);
        res.body["uploadId"]
            .as_i64()
            .expect("upload response should contain uploadId")
    }

    /// Register a user and log in, returning the auth token.
    pub async fn create_authenticated_user(&self, name: &str, email: &str, mobile: &str) -> String {
        let reg = self
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({
                    "name": name,
                    "email": email,
                    "mobile": mobile,
                    "password": "securepass",
                }),
            )
            .await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = self
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({"identifier": email, "password": "securepass"}),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Files left behind in the spool directory.
    pub fn spooled_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|dir| dir.count())
            .unwrap_or(0)
    }
}

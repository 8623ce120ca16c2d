use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::app_conf::AppConfig;
use crate::config::{InstitutionConfig, JwtConfig, MongoConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::model::user::{User, UserRole};
use crate::repository::bonafide_repo::MongoBonafideRepository;
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::bonafide_router::bonafide_router;
use crate::router::user_router::user_router;
use crate::service::bonafide_service::BonafideServiceImpl;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::certificate::PlainTextCertificateRenderer;
use crate::util::jwt::JwtTokenUtilsImpl;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct App {
    config: AppConfig,
    router: Router,
    pub user_service: Arc<UserServiceImpl>,
    pub bonafide_service: Arc<BonafideServiceImpl>,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let institution = InstitutionConfig::from_env();

        let db = crate::repository::connect(&mongo_config)
            .await
            .expect("MongoDB connection error");

        let user_repo = MongoUserRepository::new(&db, mongo_config.user_collection());
        if let Err(e) = user_repo.ensure_indexes().await {
            warn!("Failed to ensure user indexes: {e}");
        }
        let user_repo: Arc<dyn UserRepository> = Arc::new(user_repo);
        let request_repo = Arc::new(MongoBonafideRepository::new(
            &db,
            mongo_config.request_collection(),
        ));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let user_service = Arc::new(UserServiceImpl::new(user_repo.clone(), jwt_utils.clone()));
        let bonafide_service = Arc::new(BonafideServiceImpl {
            request_repo,
            user_repo,
            renderer: Arc::new(PlainTextCertificateRenderer),
            institution,
        });

        let auth_state = Arc::new(AuthState {
            jwt_utils: jwt_utils.clone(),
        });

        let mut app = App {
            config,
            router: Router::new(),
            user_service,
            bonafide_service,
        };
        app.router = app.create_router(auth_state);
        app.create_first_admin_user().await;
        app
    }

    fn create_router(&self, auth_state: Arc<AuthState>) -> Router {
        Router::new()
            .nest(
                "/api/auth",
                user_router(self.user_service.clone(), auth_state.clone()),
            )
            .nest(
                "/api/bonafide",
                bonafide_router(self.bonafide_service.clone(), auth_state),
            )
            .route("/health", get(|| async { "OK" }))
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }

    /// Bootstrap the first admin account from ADMIN_* env vars. Skipped when
    /// the config is absent or the account already exists.
    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };

        let email = admin_conf.email.trim().to_lowercase();
        match self.user_service.user_repo.find_by_email(&email).await {
            Ok(Some(_)) => {
                info!("Admin user already exists, skipping creation.");
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to check for existing admin user: {e}");
                return;
            }
        }

        let user = User {
            id: None,
            name: admin_conf.name.clone(),
            email,
            password_hash: String::new(), // set by register
            role: UserRole::Admin,
            roll_number: String::new(),
            department: String::new(),
            course: String::new(),
            father_name: String::new(),
            date_of_birth: String::new(),
            created_at: None,
            updated_at: None,
        };
        match self.user_service.register(user, admin_conf.password.clone()).await {
            Ok(_) => {
                info!("First admin user created.");
                warn!("Please change the admin password after first login!");
            }
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}

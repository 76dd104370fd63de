use anyhow::Result;

use sqlx::{Pool, Postgres};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot::Receiver;
use tracing::{error, info};

use crate::cfg::CONFIG;
use crate::constant;
use crate::error::TradeError;
use crate::ledger::repo::LedgerRepo;
use crate::mdw::{Middleware, SessionUser};
use crate::quote::client::QuoteClient;
use crate::req::Method::{GET, POST};
use crate::req::Request;
use crate::svc::Service;
use crate::user::repo::UserRepo;
use crate::utils;
use std::sync::Arc;

pub struct Server {
    svc: Arc<Service>,
}

impl Server {
    pub fn new(pool: Pool<Postgres>, quotes: QuoteClient) -> Self {
        Self {
            svc: Arc::new(Service::new(
                UserRepo::new(pool.clone()),
                LedgerRepo::new(pool.clone()),
                quotes,
            )),
        }
    }

    pub async fn start(self, mut shutdown_rx: Receiver<()>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&CONFIG.bind_addr).await?;
        info!("Server running on http://{}", CONFIG.bind_addr);

        loop {
            tokio::select! {
                conn = listener.accept() => {
                    let (stream, _) = conn?;
                    let svc = Arc::clone(&self.svc);
                    tokio::spawn(async move {
                        crate::logging::thread_logging(crate::constant::LOGGING_INCOMING_REQUEST);
                        if let Err(e) = Self::handle_client(stream, &svc).await {
                            error!("Connection error: {}", e);
                        }
                    });
                },
                _ = &mut shutdown_rx => {
                    info!("shutting down ...");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn handle_client(mut stream: TcpStream, svc: &Arc<Service>) -> Result<()> {
        let (request, session) = match Middleware::new(&mut stream).await {
            Ok((request, session)) => (request, session),
            Err(e) => {
                info!("error {}", e);
                stream
                    .write_all(format!("{}{}", constant::BAD_REQUEST, "").as_bytes())
                    .await?;
                return Ok(());
            }
        };
        let (_, mut writer) = stream.split();

        if let Err(e) = Self::route(&request, session, svc, &mut writer).await {
            error!("handler failed on {}: {:?}", request.path, e);
            writer
                .write_all(constant::INTERNAL_ERROR.as_bytes())
                .await?;
        }
        Ok(())
    }

    async fn route<W: AsyncWrite + Unpin>(
        request: &Request,
        session: Option<SessionUser>,
        svc: &Arc<Service>,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        //Router
        match (&request.method, request.path.as_str()) {
            (POST, "/login") => return svc.login(request, writer).await,
            (POST, "/register") => return svc.register(request, writer).await,
            (GET, "/logout") => return svc.logout(writer).await,
            _ => {}
        }

        // Everything below needs a session
        let session = match session {
            Some(session) => session,
            None => {
                writer
                    .write_all(utils::redirect_response("/login", None).as_bytes())
                    .await?;
                return Ok(());
            }
        };

        match (&request.method, request.path.as_str()) {
            (GET, "/") => svc.index(&session, writer).await,
            (POST, "/buy") => svc.buy(request, &session, writer).await,
            (POST, "/sell") => svc.sell(request, &session, writer).await,
            (GET, "/sell") => svc.sell_options(&session, writer).await,
            (GET, "/quote") | (POST, "/quote") => svc.quote(request, writer).await,
            (GET, "/history") => svc.history(&session, writer).await,
            (POST, "/withdraw") => svc.withdraw(request, &session, writer).await,

            _ => {
                writer
                    .write_all(format!("{}{}", constant::NOT_FOUND, "404 Not Found").as_bytes())
                    .await?;
                Ok(())
            }
        }
    }
}

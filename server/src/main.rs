#[macro_use]
extern crate rocket;

mod entrypoints;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use progress_server::{config::Env, db};

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = Env::load().expect("Failed to load environment variables");

    let span = tracing::info_span!("Starting Rocket");
    let _enter = span.enter();

    rocket::build()
        .attach(db::stage())
        .attach(progress_server::stage(env))
        .attach(entrypoints::stage())
}

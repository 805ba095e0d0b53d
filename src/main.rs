#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    registrar_portal_server::run().await
}

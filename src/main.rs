#[actix_web::main]
async fn main() -> std::io::Result<()> {
    docuforge_server::run().await
}

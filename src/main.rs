#[tokio::main]
async fn main() {
    if let Err(err) = barbershop_booking::run().await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}

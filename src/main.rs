#[tokio::main]
async fn main() {
    if let Err(e) = uchino_kakeibo_lib::run().await {
        eprintln!("スキャンプロキシの実行中にエラーが発生しました: {e}");
        std::process::exit(1);
    }
}

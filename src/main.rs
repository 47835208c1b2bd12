fn main() {
    println!("Mastermind - networked guessing game");
    println!();
    println!("Usage:");
    println!("  Start the server:   cargo run --bin server");
    println!("  Connect a client:   cargo run --bin client");
    println!();
    println!("The server listens on UDP+TCP port 58030 by default.");
}

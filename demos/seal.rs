use gcmkit::Result;
use gcmkit::cipher::aes::Aes;
use gcmkit::gcm::{open, seal};

fn main() -> Result<()> {
    let key = [0x42u8; 16];
    let iv = b"unique nonce"; // 12 bytes, never reused under one key
    let aad = b"msg-id=7";

    let cipher = Aes::new(&key)?;
    let sealed = seal(cipher.clone(), iv, aad, b"attack at dawn")?;

    print!("sealed:");
    for byte in &sealed {
        print!(" {byte:02x}");
    }
    println!();

    let plaintext = open(cipher, iv, aad, &sealed)?;
    println!("opened: {}", String::from_utf8_lossy(&plaintext));

    Ok(())
}

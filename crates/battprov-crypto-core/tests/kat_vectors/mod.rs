mod hmac_sha256;
mod stream_cipher;


#[cfg(feature = "hmac")]
pub mod hmac {
    pub const SECRET: &str = "a-string-secret-at-least-256-bits-long";

    pub const HS256_TOKEN: &str = concat!(
        "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.",
        "eyJzdWIiOiIxMjM0NTY3ODkwIiwiaWF0IjoxNTE2MjM5MDIyLCJhdWQiOiJzaW5nbGUifQ.",
        "snv1el4gvj_gOpFB1riTYb4ZuD8AXs4AUmvv8ggf3jE",
    );
}

#[cfg(feature = "rsa")]
pub mod rsa {
    pub const PRIVATE: &str = include_str!("../data/rsa/private.pem");
    pub const PUBLIC: &str = include_str!("../data/rsa/public.pem");
    pub const ALT_PRIVATE: &str = include_str!("../data/rsa/alt-private.pem");
    pub const ALT_PUBLIC: &str = include_str!("../data/rsa/alt-public.pem");

    /// Encrypted with the passphrase `testing`
    pub const PRIVATE_ENCRYPTED: &str = include_str!("../data/rsa/private-encrypted.pem");

    /// 1024-bit keys
    pub const SHORT_PRIVATE: &str = include_str!("../data/rsa/short-private.pem");
    pub const SHORT_PUBLIC: &str = include_str!("../data/rsa/short-public.pem");
}

#[cfg(feature = "ec")]
pub mod ec {
    pub const P256_PRIVATE: &str = include_str!("../data/ec/p256-private.pem");
    pub const P256_PUBLIC: &str = include_str!("../data/ec/p256-public.pem");

    /// Encrypted with the passphrase `testing`
    pub const P256_PRIVATE_ENCRYPTED: &str = include_str!("../data/ec/p256-private-encrypted.pem");

    pub const P384_PRIVATE: &str = include_str!("../data/ec/p384-private.pem");
    pub const P384_PUBLIC: &str = include_str!("../data/ec/p384-public.pem");

    pub const P521_PRIVATE: &str = include_str!("../data/ec/p521-private.pem");
    pub const P521_PUBLIC: &str = include_str!("../data/ec/p521-public.pem");
    pub const P521_ALT_PRIVATE: &str = include_str!("../data/ec/p521-alt-private.pem");
    pub const P521_ALT_PUBLIC: &str = include_str!("../data/ec/p521-alt-public.pem");

    /// `{"hello":"world"}` signed with [`P256_PRIVATE`]
    pub const ES256_TOKEN: &str = concat!(
        "eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzI1NiJ9.",
        "eyJoZWxsbyI6IndvcmxkIn0.",
        "IOrGKlsR7b4delvLhpGT8TtEAlyRfMmPvJRcY5m5ZbFC9Mmj4rHvDlIG06CsaALAHoHLI4yBJePkxgwTQIRK6A",
    );

    /// `{"hello":"world"}` signed with [`P521_PRIVATE`]
    pub const ES512_TOKEN: &str = concat!(
        "eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzUxMiJ9.",
        "eyJoZWxsbyI6IndvcmxkIn0.",
        "AXyx5kQ5QMkKCiYljPrLCotVBcK2vjLElKKMRtioHAbVN81U5dGzu_CLHveidUMV82FVY6aiQ4FmXh1idxhgvQki",
        "AcwGd3Dr68OpVi4qlxjuzdg9JpXTremolqKMRZKTMhNBkNPQ12NFBfoXCWTzeG9FVJKhqpN1CqVHpM2zoJ48JHaB",
    );
}

#[cfg(feature = "eddsa")]
pub mod eddsa {
    /// Raw Ed25519 seed, base64url
    pub const SEED: &str = "c7TjASrgOYi2MBtZ1akm7gFqP1QjvwUCPwyBYRYGN88";
    /// Raw Ed25519 public key for [`SEED`], base64url
    pub const PUBLIC: &str = "NQyLDvpVy9cnP2po_PfwwQN1dy3cRPy1eCJukfiFZH4";
    /// An unrelated raw Ed25519 public key, base64url
    pub const ALT_PUBLIC: &str = "GpymI7a2uaGh9JoW3nq5sHE2qFv9FFZLFSi7HZu9EKo";

    pub const PRIVATE_PEM: &str = include_str!("../data/eddsa/private.pem");
    pub const PUBLIC_PEM: &str = include_str!("../data/eddsa/public.pem");

    /// `{"hello":"world"}` signed with [`SEED`]
    pub const TOKEN: &str = concat!(
        "eyJ0eXAiOiJKV1QiLCJhbGciOiJFZERTQSJ9.",
        "eyJoZWxsbyI6IndvcmxkIn0.",
        "x4X9kF0PY42fCZCKq6sarCNKoMI7NL_chGTys-LTTkdAx2CC8xm8GJJLL4tYXyxRCFUC8RhyY_0OW5OrZcKgAw",
    );
}

//! Unicode case folding for SQLite connections.
//!
//! SQLite's built-in `lower()` folds ASCII only, while the engine lowercases
//! bound values with [`str::to_lowercase`]. Replacing `lower()` on every
//! pooled connection makes both sides of `LOWER(col) = ?` and
//! `LOWER(col) LIKE ?` fold the same way.

use std::ffi::c_int;

use libsqlite3_sys as ffi;
use sqlx::sqlite::{SqliteConnection, SqlitePoolOptions};

/// Pool options with [`register_unicode_lower`] run on every new connection.
///
/// ```ignore
/// let pool = rowgate_data_sqlx::sqlite_pool_options()
///     .max_connections(5)
///     .connect("sqlite://shop.db")
///     .await?;
/// ```
pub fn sqlite_pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .after_connect(|conn, _meta| Box::pin(async move { register_unicode_lower(conn).await }))
}

/// Replace `lower(X)` on this connection with Rust's Unicode lowercase.
pub async fn register_unicode_lower(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let mut handle = conn.lock_handle().await?;
    let db = handle.as_raw_handle().as_ptr();
    // SAFETY: `db` is a live connection held locked for the whole call, the
    // name is a NUL-terminated literal and no user data pointer is passed.
    let rc = unsafe {
        ffi::sqlite3_create_function_v2(
            db,
            c"lower".as_ptr(),
            1,
            ffi::SQLITE_UTF8 | ffi::SQLITE_DETERMINISTIC,
            std::ptr::null_mut(),
            Some(unicode_lower),
            None,
            None,
            None,
        )
    };
    if rc != ffi::SQLITE_OK {
        let msg = format!("registering unicode lower() failed with code {rc}");
        return Err(sqlx::Error::Protocol(msg));
    }
    tracing::trace!("unicode lower() registered");
    Ok(())
}

unsafe extern "C" fn unicode_lower(
    ctx: *mut ffi::sqlite3_context,
    argc: c_int,
    argv: *mut *mut ffi::sqlite3_value,
) {
    if argc != 1 {
        ffi::sqlite3_result_null(ctx);
        return;
    }
    let value = *argv;
    if ffi::sqlite3_value_type(value) == ffi::SQLITE_NULL {
        ffi::sqlite3_result_null(ctx);
        return;
    }
    // text first, then bytes: the length is of the converted value
    let text = ffi::sqlite3_value_text(value);
    let len = ffi::sqlite3_value_bytes(value);
    if text.is_null() || len < 0 {
        ffi::sqlite3_result_null(ctx);
        return;
    }
    let bytes = std::slice::from_raw_parts(text, len as usize);
    let lowered = String::from_utf8_lossy(bytes).to_lowercase();
    match c_int::try_from(lowered.len()) {
        Ok(n) => ffi::sqlite3_result_text(ctx, lowered.as_ptr().cast(), n, ffi::SQLITE_TRANSIENT()),
        Err(_) => ffi::sqlite3_result_error_toobig(ctx),
    }
}

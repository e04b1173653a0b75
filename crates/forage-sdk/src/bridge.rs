//! Callback delivery for store operations.
//!
//! Operations return futures. Callers that prefer a callback wrap the future
//! with [`execute_callback`]; they still get the same result back.

use std::future::Future;

/// Await `future`, hand its outcome to `callback` if one was given, and return
/// the outcome unchanged.
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use forage_sdk::execute_callback;
///
/// let mut seen = None;
/// let result: Result<u32, ()> =
///     execute_callback(async { Ok(7) }, Some(|r: &Result<u32, ()>| seen = r.ok())).await;
/// assert_eq!(result, Ok(7));
/// assert_eq!(seen, Some(7));
/// # });
/// ```
pub async fn execute_callback<T, E, Fut, C>(future: Fut, callback: Option<C>) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    C: FnOnce(&Result<T, E>),
{
    let result = future.await;
    if let Some(callback) = callback {
        callback(&result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = fn(&Result<i32, String>);

    #[tokio::test]
    async fn without_callback_returns_result() {
        let result = execute_callback(async { Ok::<_, String>(3) }, None::<Callback>).await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn callback_sees_success() {
        let mut calls = Vec::new();
        let result = execute_callback(
            async { Ok::<_, String>(5) },
            Some(|r: &Result<i32, String>| calls.push(r.clone())),
        )
        .await;
        assert_eq!(result, Ok(5));
        assert_eq!(calls, vec![Ok(5)]);
    }

    #[tokio::test]
    async fn callback_sees_error() {
        let mut seen = None;
        let result = execute_callback(
            async { Err::<i32, _>("boom".to_string()) },
            Some(|r: &Result<i32, String>| seen = r.clone().err()),
        )
        .await;
        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(seen.as_deref(), Some("boom"));
    }
}

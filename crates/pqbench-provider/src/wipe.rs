use zeroize::Zeroize;

/// Overwrites a native pqcrypto key or secret struct with zeros, in place.
///
/// The pqcrypto `SecretKey` and `SharedSecret` types are `Copy` byte arrays with no zeroize
/// support of their own, so every value the sessions hold in a local goes through here
/// before it leaves scope.
///
/// # Safety
///
/// `T` must be plain bytes: every all-zero bit pattern is a valid `T` and it owns no heap
/// memory. The pqcrypto key, ciphertext and secret structs are tuple structs over `[u8; N]`.
pub(crate) unsafe fn wipe_native<T: Copy>(value: &mut T) {
    let bytes =
        std::slice::from_raw_parts_mut(value as *mut T as *mut u8, std::mem::size_of::<T>());
    bytes.zeroize();
}

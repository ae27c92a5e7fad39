/// The least power of 2 that is greater than or equal to `x`. Texture dimensions must be powers of 2, so every chunk is
/// padded up to this size. Values less than 1 map to 1.
#[inline]
pub fn next_pow2(x: i32) -> i32 {
    if x <= 1 {
        return 1;
    }

    (x as u32).next_power_of_two() as i32
}

/// Returns `true` iff `x` is a positive power of 2.
#[inline]
pub fn is_pow2(x: i32) -> bool {
    x > 0 && (x as u32).is_power_of_two()
}

/// The greatest power of 2 that is less than or equal to `x`, for clamping a requested size to a hardware limit.
#[inline]
pub fn prev_pow2(x: i32) -> i32 {
    assert!(x > 0);

    1 << (31 - (x as u32).leading_zeros())
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

//! Platform helpers used by the comparison loops and the timing harness.

/// Reads `bytes[i]` through a volatile load so the compiler cannot reason
/// about the value and turn the surrounding fold into a branch.
///
/// # Panics
///
/// Panics if `i` is out of bounds, like ordinary indexing.
#[inline(always)]
pub fn load(bytes: &[u8], i: usize) -> u8 {
    let byte = &bytes[i];
    // SAFETY: `byte` is a valid, aligned reference into `bytes`.
    unsafe { core::ptr::read_volatile(byte) }
}

/// Serializing fence placed around timed regions.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn serialize() {
    // SAFETY: lfence has no memory-safety preconditions; sse2 is baseline on x86_64.
    unsafe { core::arch::x86_64::_mm_lfence() }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub fn serialize() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// Pins the calling thread to `cpu`. Returns `false` if the kernel refused.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> bool {
    if cpu >= libc::CPU_SETSIZE as usize {
        log::warn!("cpu {} is outside the affinity mask", cpu);
        return false;
    }

    // SAFETY: cpu_set_t is plain data; zeroed is a valid empty set.
    let rc = unsafe {
        let mut set: libc::cpu_set_t = core::mem::zeroed();
        libc::CPU_SET(cpu, &mut set);
        libc::sched_setaffinity(0, core::mem::size_of::<libc::cpu_set_t>(), &set)
    };

    if rc != 0 {
        log::warn!(
            "sched_setaffinity({}) failed: {}",
            cpu,
            std::io::Error::last_os_error()
        );
        return false;
    }
    log::debug!("pinned to cpu {}", cpu);
    true
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(cpu: usize) -> bool {
    log::warn!("cpu pinning is not supported on this platform (requested {})", cpu);
    false
}

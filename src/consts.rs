/// Harts on the default VexRiscv-SMP configuration
pub const VEX_HART_COUNT: usize = 8;
pub const VEX_HART_STACK_SIZE: usize = 8192;

pub const VEX_UART_ADDR: usize = 0xf000_1000;
pub const VEX_CTRL_ADDR: usize = 0xf000_0000; // LiteX CSR control block
pub const VEX_PLIC_ADDR: usize = 0xf0c0_0000;
pub const VEX_PLIC_NUM_SOURCES: usize = 4;
pub const VEX_CLINT_ADDR: usize = 0xf001_0000;
pub const VEX_MTIMER_FREQ: u64 = 100_000_000;

pub const VEX_MSWI_ADDR: usize = VEX_CLINT_ADDR + CLINT_MSWI_OFFSET;
pub const VEX_MTIMER_ADDR: usize = VEX_CLINT_ADDR + CLINT_MTIMER_OFFSET;

pub const PLIC_MAX_IRQ: usize = 511;

/// Every hart owns 2 contexts: M-mode + S-mode
pub const CONTEXT_PER_HART: usize = 2;
pub const PLIC_MAX_CONTEXTS: usize = 64;

/// Enable area of one context: 0x80 bytes (32 u32 words, 1024 bits)
pub const CONTEXT_ENABLE_STRIDE: usize = 0x80;

/// Threshold + claim block of one context is 4K
pub const CONTEXT_STRIDE: usize = 0x1000;

pub const PLIC_PRIO_BEGIN: usize = 0x0000;
pub const PLIC_PRIO_END: usize = 0x0FFF;

pub const PLIC_PENDING_BEGIN: usize = 0x1000;
pub const PLIC_PENDING_END: usize = 0x1FFF;

pub const PLIC_ENABLE_BEGIN: usize = 0x2000;
pub const PLIC_ENABLE_END: usize = 0x1f_ffff;

pub const PLIC_THRESHOLD_CLAIM_BEGIN: usize = 0x20_0000;
pub const PLIC_THRESHOLD_CLAIM_END: usize = 0x3f_ffff;

/// Threshold that masks every source of a context
pub const PLIC_THRESHOLD_MASK_ALL: u32 = 0x7;

// Legacy CLINT layout, also the default ACLINT placement
pub const CLINT_MSWI_OFFSET: usize = 0x0000;
pub const CLINT_MTIMER_OFFSET: usize = 0x4000;
pub const CLINT_SIZE: usize = 0xc000;

pub const ACLINT_MSWI_SIZE: usize = 0x4000;
pub const ACLINT_DEFAULT_MTIME_OFFSET: usize = 0x7ff8;
pub const ACLINT_DEFAULT_MTIME_SIZE: usize = 0x8;
pub const ACLINT_DEFAULT_MTIMECMP_OFFSET: usize = 0x0000;
pub const ACLINT_DEFAULT_MTIMECMP_SIZE: usize = 0x7ff8;

// LiteX UART CSRs, one 32-bit word each
pub const UART_RXTX: usize = 0x00;
pub const UART_TXFULL: usize = 0x04;
pub const UART_RXEMPTY: usize = 0x08;
pub const UART_EV_STATUS: usize = 0x0c;
pub const UART_EV_PENDING: usize = 0x10;
pub const UART_EV_ENABLE: usize = 0x14;
pub const UART_WINDOW_SIZE: usize = 0x100;

// LiteX control CSRs
pub const CTRL_RESET: usize = 0x00;
pub const CTRL_SCRATCH: usize = 0x04;
pub const CTRL_BUS_ERRORS: usize = 0x08;
pub const CTRL_WINDOW_SIZE: usize = 0x100;

/// Scratch codes a simulation harness watches for
pub const CTRL_CODE_PASS: u32 = 0x5555;
pub const CTRL_CODE_FAIL: u32 = 0x3333;

/// A private module encapsulating register offsets for the nRF24L01.
pub mod registers {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const TX_ADDR: u8 = 0x10;
    pub const FIFO_STATUS: u8 = 0x17;
    pub const DYNPD: u8 = 0x1C;
    pub const FEATURE: u8 = 0x1D;

    /// The register holding the RX address of `pipe`.
    pub const fn rx_addr(pipe: u8) -> u8 {
        RX_ADDR_P0 + (pipe & 7)
    }
}

/// A private module encapsulating SPI commands for the nRF24L01.
pub mod commands {
    pub const R_REGISTER: u8 = 0x00;
    pub const W_REGISTER: u8 = 0x20;
    pub const R_RX_PL_WID: u8 = 0x60;
    pub const R_RX_PAYLOAD: u8 = 0x61;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    pub const W_ACK_PAYLOAD: u8 = 0xA8;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
    pub const NOP: u8 = 0xFF;

    const REG_MASK: u8 = 0x1F;

    pub const fn read_register(register: u8) -> u8 {
        R_REGISTER | (register & REG_MASK)
    }

    pub const fn write_register(register: u8) -> u8 {
        W_REGISTER | (register & REG_MASK)
    }

    pub const fn write_ack_payload(pipe: u8) -> u8 {
        W_ACK_PAYLOAD | (pipe & 7)
    }
}

/// A private module to encapsulate bit mnemonics
pub mod mnemonics {
    pub const MASK_RX_DR: u8 = 1 << 6;
    pub const MASK_TX_DS: u8 = 1 << 5;
    pub const MASK_MAX_RT: u8 = 1 << 4;
    pub const PWR_UP: u8 = 1 << 1;
    pub const EN_DPL: u8 = 1 << 2;
    pub const EN_ACK_PAY: u8 = 1 << 1;
    /// Value of SETUP_AW for 5 byte addresses.
    pub const ADDRESS_WIDTH_5: u8 = 3;
    /// Bit 0 of FIFO_STATUS: the RX FIFO is empty.
    pub const RX_EMPTY: u8 = 1;
}

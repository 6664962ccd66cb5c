//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarMap;
use log::trace;

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track(), tau = {}", tau);
    let dest = dest
        .data()
        .lock()
        .map_err(|e| anyhow!("Failed to lock the destination: {}", e))?;
    let src = src
        .data()
        .lock()
        .map_err(|e| anyhow!("Failed to lock the source: {}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .ok_or_else(|| anyhow!("Variable {} is not found in the source", k_dest))?;
        let t_src = v_src.as_tensor();
        let t_dest = v_dest.as_tensor();
        let t_dest = (t_src.affine(tau, 0.0)? + t_dest.affine(1.0 - tau, 0.0)?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Returns the values of the variables, sorted by name and flattened.
pub fn parameter_values(varmap: &VarMap) -> Result<Vec<Vec<f32>>> {
    let data = varmap
        .data()
        .lock()
        .map_err(|e| anyhow!("Failed to lock the variables: {}", e))?;
    let mut names = data.keys().collect::<Vec<_>>();
    names.sort();

    let mut values = Vec::with_capacity(names.len());
    for k in names {
        values.push(data[k].as_tensor().flatten_all()?.to_vec1::<f32>()?);
    }

    Ok(values)
}

/// Converts a batch of vectors into a 2D tensor of shape `(batch_size, dim)`.
pub fn vecs_to_tensor(vs: &[Vec<f32>], dim: usize, device: &Device) -> Result<Tensor> {
    let batch_size = vs.len();
    let data = vs.iter().flatten().copied().collect::<Vec<_>>();
    if data.len() != batch_size * dim {
        return Err(anyhow!(
            "Expected {} vectors of dimension {}, got {} values",
            batch_size,
            dim,
            data.len()
        ));
    }
    Ok(Tensor::from_vec(data, (batch_size, dim), device)?)
}

/// Converts a 2D tensor into a vector per row.
pub fn tensor_to_vecs(t: &Tensor) -> Result<Vec<Vec<f32>>> {
    Ok(t.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;
}

/// Interface for handling input dimensions.
pub trait InDim {
    /// Returns the input dimension.
    fn get_in_dim(&self) -> usize;
}
